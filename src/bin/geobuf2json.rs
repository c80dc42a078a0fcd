use std::io::Read;

fn main() {
    if let Err(err) = run() {
        eprintln!("geobuf2json failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let bytes = match std::env::args().nth(1) {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let geojson = prost_geobuf::from_geobuf(&bytes)?;
    println!("{}", serde_json::to_string_pretty(&geojson)?);
    Ok(())
}

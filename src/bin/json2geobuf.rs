use std::io::{Read, Write};

fn main() {
    if let Err(err) = run() {
        eprintln!("json2geobuf failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut precision = 6u32;
    let mut path = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--precision" {
            precision = args
                .next()
                .ok_or("--precision needs a value")?
                .parse::<u32>()?;
        } else {
            path = Some(arg);
        }
    }

    let text = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let geojson: serde_json::Value = serde_json::from_str(&text)?;
    let bytes = prost_geobuf::to_geobuf(&geojson, precision)?;
    std::io::stdout().write_all(&bytes)?;
    Ok(())
}

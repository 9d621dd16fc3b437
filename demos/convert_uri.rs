//! Parses a driver URI and prints it back out, component by component —
//! a small tool for checking how a given URI string will be split into
//! driver tag / path / mesh name before it's handed to [`DriverManager`].
//!
//! ```text
//! cargo run --bin convert_uri -- 'HEC2D:"plan.hdf":2D Area 1'
//! ```

use std::env;
use std::process::ExitCode;

use mdal::uri::{format_uri, parse_uri};

fn main() -> ExitCode {
    let Some(uri) = env::args().nth(1) else {
        eprintln!("usage: convert_uri <uri>");
        return ExitCode::FAILURE;
    };

    match parse_uri(&uri) {
        Ok(parsed) => {
            println!("driver: {}", parsed.driver.as_deref().unwrap_or("(none)"));
            println!("path: {}", parsed.path);
            println!("mesh name: {}", parsed.mesh_name.as_deref().unwrap_or("(none)"));
            println!("round trip: {}", format_uri(&parsed));
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error parsing {uri}: {err}");
            ExitCode::FAILURE
        }
    }
}

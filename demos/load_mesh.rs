//! Loads a mesh named on the command line and prints its vertex/face
//! counts and dataset group names.
//!
//! ```text
//! cargo run --bin load_mesh -- path/to/mesh.2dm
//! ```

use std::env;
use std::process::ExitCode;

use mdal::DriverManager;

fn main() -> ExitCode {
    let Some(uri) = env::args().nth(1) else {
        eprintln!("usage: load_mesh <uri>");
        return ExitCode::FAILURE;
    };

    let manager = DriverManager::new();
    match manager.load(&uri) {
        Ok(mesh) => {
            println!("driver: {}", mesh.driver_name());
            println!("vertices: {}", mesh.vertex_count());
            println!("edges: {}", mesh.edge_count());
            println!("faces: {}", mesh.face_count());
            for group in mesh.dataset_groups() {
                println!(
                    "dataset group: {} ({} timesteps, {})",
                    group.name(),
                    group.dataset_count(),
                    if group.is_scalar() { "scalar" } else { "vector" }
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error loading {uri}: {err}");
            ExitCode::FAILURE
        }
    }
}

pub mod dose;
pub mod heat;
pub mod radiolysis;
pub mod tally;

use crate::utils::progress::CliProgressHandler;
use voxdose::engine::progress::ProgressReporter;
use voxdose::workflows::WorkflowOutput;

fn reporter() -> ProgressReporter<'static> {
    ProgressReporter::with_callback(CliProgressHandler::new().get_callback())
}

fn print_summary(title: &str, output: &WorkflowOutput) {
    println!();
    println!(" --- {} --- ", title);
    println!();
    for field in &output.fields {
        println!(
            "{:<22} : min {:.3e}  max {:.3e}  mean {:.3e}",
            field.name, field.stats.min, field.stats.max, field.stats.mean
        );
        if field.stats.non_finite > 0 {
            println!(
                "{:<22}   {} non-finite value(s)",
                "", field.stats.non_finite
            );
        }
    }
    println!();
    for path in &output.paths {
        println!("Wrote {}", path.display());
    }
    println!();
}

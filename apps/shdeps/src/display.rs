//! Build report rendering

use shdeps_types::BuildReport;
use std::io;

/// Output renderer for the final build report
#[derive(Clone, Copy)]
pub struct OutputRenderer {
    json_output: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    /// Print the report to stdout
    pub fn render_report(self, report: &BuildReport) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
            println!("{json}");
        } else {
            print!("{}", summary(report));
        }
        Ok(())
    }
}

/// Plain-text summary, one line per package
pub fn summary(report: &BuildReport) -> String {
    let mut out = String::new();
    for package in &report.packages {
        let mirrored = package.mirrored().count();
        let skipped = package.skipped().count();
        out.push_str(&format!(
            "{}: {mirrored} mirrored, {skipped} skipped\n",
            package.name
        ));
    }
    out.push_str(&format!(
        "{} files extracted into {}\n",
        report.files_extracted(),
        report.output_dir.display()
    ));
    if let Some(path) = &report.deployment_file {
        out.push_str(&format!("Dockerfile: {}\n", path.display()));
    }
    out
}

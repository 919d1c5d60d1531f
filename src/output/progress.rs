use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright, bright_green, bright_yellow};

/// Spinner for the two phases of the pipeline report
pub struct ReportProgress {
    pb: ProgressBar,
}

impl ReportProgress {
    pub fn start_fetching(project: &str) -> Self {
        eprintln!("{}  {}", bright("⚙️"), bright("Phases").underlined());
        let pb = create_spinner(
            bright_yellow(format!("Phase 1/2: Fetching pipelines for {project}")).to_string(),
        );
        Self { pb }
    }

    pub fn finish_fetching_start_cascade(self, failed: usize) -> Self {
        self.pb
            .finish_with_message(bright_green("Phase 1/2: Fetched pipelines ✓").to_string());
        let pb = create_spinner(
            bright_yellow(format!("Phase 2/2: Diagnosing {failed} failed pipeline(s)"))
                .to_string(),
        );
        Self { pb }
    }

    pub fn finish_cascade(self) {
        self.pb
            .finish_with_message(bright_green("Phase 2/2: Diagnostics collected ✓").to_string());
        eprintln!();
    }

    pub fn abandon(self) {
        self.pb.abandon();
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::default_spinner().template("  {msg} {spinner}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

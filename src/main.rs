//! rattendance main entrypoint.

use rattendance::errors::AppError;
use rattendance::run;
use rattendance::ui::messages::hint;

fn main() {
    println!();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        match &e {
            AppError::Unauthenticated => {
                hint("run `rattendance login <email>` and pass the token with --token");
            }
            AppError::Forbidden { home, .. } => hint(format!("your landing page is {home}")),
            AppError::InvalidImage(_) | AppError::NoMatch => {
                hint("retake the photo facing the camera")
            }
            _ => {}
        }
        std::process::exit(1);
    }
}

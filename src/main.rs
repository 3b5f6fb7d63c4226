//! purbox - offline file encryption producing padded, uniform, random-looking
//! cryptoblobs.

use std::process;

use purbox::app::App;

/// Entry point.
///
/// # Exit Codes
/// * 0 - Success (including a clean exit from the menu)
/// * 1 - Argument parsing failure, or the process was terminated by signal
fn main() {
    let app = match App::init() {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {e:?}");
            process::exit(1);
        }
    };

    if let Err(e) = app.execute() {
        eprintln!("Error: {e:?}");
        process::exit(1);
    }
}

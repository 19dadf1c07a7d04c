//! Raw noise rendered as a hard-edged solid.
//!
//! Pass `--headless out.png` to write a single frame instead of opening a
//! window.

use cumulus::*;

fn main() -> Result<()> {
    let options = Options::perlin();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [flag, path] if flag == "--headless" => render_to_file(&options, path, 800, 600),
        _ => run(options),
    }
}

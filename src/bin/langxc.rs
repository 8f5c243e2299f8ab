use langx::layout::{DrawMetrics, Layout, NullRasterizer};
use langx::source::Source;
use std::path::Path;
use std::process::ExitCode;

/// Single positional argument: path to a source file. Exit code 0 on
/// success, non-zero on any error. Flag parsing, the raster back-end, and a
/// preview window are external collaborators outside this crate's scope.
fn main() -> ExitCode {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: langxc <source-file>");
        return ExitCode::FAILURE;
    };

    match run(Path::new(&path)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn run(path: &Path) -> Result<(), String> {
    let source = Source::from_path(path).map_err(|e| e.to_string())?;
    let program = langx::parse(&source).map_err(|e| e.to_string())?;

    program.print().map_err(|e| e.to_string())?;

    let layout = Layout::build(&program);
    let mut rasterizer = NullRasterizer;
    layout.draw(DrawMetrics::default(), &mut rasterizer);

    Ok(())
}

mod app;
mod options;

use anyhow::Result;
use clap::Parser;
use winit::event_loop::EventLoop;

use app::App;
use options::Cli;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let options = cli.into_options()?;
    log::info!(
        "Starting with the {} preset at {}x{}",
        options.preset,
        options.width,
        options.height
    );

    let event_loop = EventLoop::new()?;
    let mut app = App::new(options);
    event_loop.run_app(&mut app)?;

    app.into_result()
}

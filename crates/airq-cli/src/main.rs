mod command;
mod logging;
mod schema;
mod tui;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}

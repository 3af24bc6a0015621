mod app;
mod audio;
mod config;
mod library;
mod mpris;
mod runtime;
mod ui;
mod vinyl;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}

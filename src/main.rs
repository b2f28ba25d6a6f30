use app::{AppHelper, Command, EncodeCommand};

mod app;

fn main() {
    let app_name = option_env!("CARGO_PKG_NAME").unwrap_or("unknown app name");
    let app_version = option_env!("CARGO_PKG_VERSION").unwrap_or("unknown version");
    let authors = option_env!("CARGO_PKG_AUTHORS").unwrap_or("unknown authors");
    let mut app = AppHelper::new(
        app_name,
        app_version,
        authors,
        "Phylocnf, a SAT encoder for the minimal hybridization problem.",
    );
    let commands: Vec<Box<dyn Command>> = vec![Box::new(EncodeCommand::new())];
    for c in commands {
        app.add_command(c);
    }
    app.launch_app();
}

//! Server receiving the button presses of `webplayrec`

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "webplayrec-server")]
#[command(about = "Receive and log button presses posted by webplayrec")]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:5000", env = "WEBPLAYREC_BIND")]
    bind: String,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    web_play_rec::server::serve(&args.bind).await
}

use rsvpbot::startup;
use tracing::{error, info};

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting rsvpbot");

    // Load configuration
    let config = startup::load_config()?;

    // Start the bot; transport failures exit with their own status
    if let Err(e) = startup::start_bot(config).await {
        let code = e.exit_code();
        error!("Bot stopped: {}", e);
        eprintln!("{:?}", miette::Report::new(e));
        std::process::exit(code);
    }

    Ok(())
}

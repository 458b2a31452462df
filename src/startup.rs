use crate::components::state_store::{StateStoreActor, StateStoreHandle};
use crate::components::{ComponentContext, ComponentManager, Reminder};
use crate::config::Config;
use crate::error::{BotResult, Error};
use crate::shutdown;
use crate::transport::{ConsoleTransport, InboundMessage, Transport, TransportEvent};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{error, info, warn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    // stdout carries console transport output
    tracing::subscriber::set_global_default(log_subscriber(std::io::stderr))
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

fn log_subscriber<W>(writer: W) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .with_writer(writer)
        .finish()
}

/// Load and initialize the application config
pub fn load_config() -> BotResult<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e)
        }
    }
}

/// Start the state store, the transport and the reminder component
pub async fn start_bot(config: Arc<RwLock<Config>>) -> BotResult<()> {
    let (state_dir, pending_expiry_hours) = {
        let config_read = config.read().await;
        rust_i18n::set_locale(&config_read.bot_locale);
        info!("Setting locale to {}", config_read.bot_locale);
        info!("Timezone offset: {}", chrono::Local::now().format("%:z"));
        (
            config_read.state_dir.clone(),
            config_read.pending_expiry_hours,
        )
    };

    // Initialize the state store
    let (mut store_actor, store_handle) =
        StateStoreActor::new(state_dir, chrono::Duration::hours(pending_expiry_hours));

    // Spawn state store actor task
    tokio::spawn(async move {
        store_actor.run().await;
    });

    // Connect the messaging transport
    let (transport, events) = ConsoleTransport::connect();
    let transport: Arc<dyn Transport> = Arc::new(transport);

    // Register components
    let mut component_manager = ComponentManager::new();
    component_manager.register(Reminder::new());
    let component_manager = Arc::new(component_manager);

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Spawn signal handler task
    let shutdown_components = Arc::clone(&component_manager);
    let shutdown_store = store_handle.clone();
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_components, shutdown_store).await;
    });

    let ctx = ComponentContext {
        config,
        transport,
        store: store_handle,
    };

    run_event_loop(events, component_manager, ctx, shutdown_recv).await
}

/// Dispatch transport events until shutdown or a fatal transport event
pub async fn run_event_loop(
    mut events: mpsc::Receiver<TransportEvent>,
    component_manager: Arc<ComponentManager>,
    ctx: ComponentContext,
    mut shutdown_recv: oneshot::Receiver<()>,
) -> BotResult<()> {
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(TransportEvent::Ready) => {
                    info!("Messaging transport is ready");
                    component_manager.init_all(ctx.clone()).await?;
                    info!("Bot will continue running to listen for responses");
                }
                Some(TransportEvent::Message(message)) => {
                    dispatch_message(&component_manager, message).await;
                }
                Some(TransportEvent::AuthFailure(reason)) => {
                    error!("Authentication failed: {}", reason);
                    stop(&component_manager, &ctx.store).await;
                    return Err(Error::AuthFailure(reason));
                }
                Some(TransportEvent::Disconnected(reason)) => {
                    error!("Client was disconnected: {}", reason);
                    stop(&component_manager, &ctx.store).await;
                    return Err(Error::Disconnected(reason));
                }
                None => {
                    error!("Transport event stream ended");
                    stop(&component_manager, &ctx.store).await;
                    return Err(Error::Disconnected("event stream closed".to_string()));
                }
            },
            _ = &mut shutdown_recv => {
                info!("Received shutdown signal, shutting down bot...");
                return Ok(());
            }
        }
    }
}

/// Hand an inbound message to the reminder service on its own task
async fn dispatch_message(component_manager: &ComponentManager, message: InboundMessage) {
    let Some(reminder) = component_manager.get::<Reminder>() else {
        warn!("Reminder component not registered, dropping message");
        return;
    };

    match reminder.get_service().await {
        Some(service) => {
            tokio::spawn(async move {
                service.handle_inbound(message).await;
            });
        }
        None => warn!("Message from {} arrived before the bot was ready", message.from),
    }
}

async fn stop(component_manager: &ComponentManager, store: &StateStoreHandle) {
    if let Err(e) = component_manager.shutdown_all().await {
        error!("Error shutting down components: {:?}", e);
    }
    let _ = store.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_logs_go_to_the_given_writer() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = log_subscriber(move || writer.clone());

        tracing::subscriber::with_default(subscriber, || {
            error!("state file unreadable");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("state file unreadable"));
    }
}

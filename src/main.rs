use std::env;
use std::io;
use std::process::ExitCode;

use promo_finder::csv::{View, ViewEntry, read_intents, write_view};
use promo_finder::{Catalog, Engine};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let Some(intents_path) = args.next() else {
        error!("usage: promo-finder <intents.csv> [offers.csv]");
        return ExitCode::FAILURE;
    };

    if !intents_path.ends_with(".csv") {
        warn!(path = intents_path, "input file seems to not be a csv file");
    }

    let catalog = match args.next() {
        Some(path) => Catalog::from_path(path),
        None => Catalog::seed(),
    };
    let catalog = match catalog {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let intents = match read_intents(intents_path) {
        Ok(intents) => intents,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut engine = Engine::new(catalog);
    let (intent_sender, intent_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in intents {
            match result {
                Ok(intent) => {
                    if intent_sender.send(intent).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    engine.run(ReceiverStream::new(intent_receiver)).await;

    let grid = engine
        .visible_offers()
        .into_iter()
        .map(|offer| (View::Grid, offer));
    let results = engine.search_results();
    let search = results
        .iter()
        .flat_map(|results| results.offers())
        .map(|offer| (View::Search, offer));
    let detail = engine.selected_offer().map(|offer| (View::Detail, offer));

    let entries = grid
        .chain(search)
        .chain(detail)
        .map(|(view, offer)| ViewEntry {
            view,
            offer,
            favorite: engine.is_favorite(offer.id),
        });

    if let Err(e) = write_view(io::stdout().lock(), entries) {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

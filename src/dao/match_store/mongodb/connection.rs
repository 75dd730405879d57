//! Initial MongoDB connection bootstrap.
//!
//! The coordinator keeps answering in degraded mode while the database is
//! down, so the bootstrap gives up after a short ping budget and leaves
//! long-horizon retrying to the storage supervisor.

use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;
use tracing::warn;

use super::error::{MongoDaoError, MongoResult};

/// Ping attempts before the bootstrap reports failure to the supervisor.
const MAX_PING_ATTEMPTS: u32 = 5;
/// Delay before the second ping attempt; doubles up to [`MAX_PING_DELAY`].
const INITIAL_PING_DELAY: Duration = Duration::from_millis(250);
/// Ceiling for the doubling ping delay.
const MAX_PING_DELAY: Duration = Duration::from_secs(2);

/// Build a client from parsed options and ping the match database until it
/// answers or the attempt budget is spent.
pub(super) async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    let mut attempts = 0;
    let mut delay = INITIAL_PING_DELAY;
    loop {
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => return Ok((client, database)),
            Err(err) => {
                attempts += 1;
                if attempts >= MAX_PING_ATTEMPTS {
                    return Err(MongoDaoError::InitialPing {
                        attempts,
                        source: err,
                    });
                }
                warn!(attempt = attempts, error = %err, "match database ping failed; retrying");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_PING_DELAY);
            }
        }
    }
}

//! Utility for asynchronously loading creature listings.
//!
//! The [`Dex`] type fetches search results, creature details and sprites on
//! background threads, so that rendering never waits on the network. Each
//! lookup returns `None` until its result has arrived.

use std::hash::Hash;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use crossbeam::channel::Sender;

use dashmap::DashMap;

use catchdex::api;
use catchdex::model::Creature;
use catchdex::model::CreatureDetail;
use catchdex::Api;

enum Slot<V> {
  Loading,
  Ready(Arc<V>),
  /// The last fetch failed; it is retried once `retry_delay(attempts)` has
  /// passed since `at`.
  Failed { at: Instant, attempts: u32 },
}

const FIRST_RETRY: Duration = Duration::from_millis(250);
const MAX_RETRY: Duration = Duration::from_secs(10);

/// Doubles the wait after each consecutive failure.
fn retry_delay(attempts: u32) -> Duration {
  let doublings = attempts.saturating_sub(1).min(6);
  (FIRST_RETRY * 2u32.pow(doublings)).min(MAX_RETRY)
}

/// A table of values fetched in the background, keyed by `K`.
pub struct Table<K, V> {
  api: Arc<Api>,
  table: Arc<DashMap<K, Slot<V>>>,
  error_sink: Sender<api::Error>,
}

impl<K, V> Table<K, V>
where
  K: Eq + Hash + Clone + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  pub fn new(api: Arc<Api>, error_sink: Sender<api::Error>) -> Self {
    Self {
      api,
      table: Default::default(),
      error_sink,
    }
  }

  /// Looks up `key`, spawning `fetch` to produce it on first use.
  ///
  /// Each failure is reported to the error sink; the next lookup after a
  /// backoff delay fetches again.
  pub fn get(
    &self,
    key: &K,
    fetch: fn(&Api, &K) -> Result<V, api::Error>,
  ) -> Option<Arc<V>> {
    let attempts = match self.table.get(key).as_deref() {
      Some(Slot::Loading) => return None,
      Some(Slot::Ready(val)) => return Some(Arc::clone(val)),
      Some(Slot::Failed { at, attempts })
        if at.elapsed() < retry_delay(*attempts) =>
      {
        return None
      }
      Some(Slot::Failed { attempts, .. }) => *attempts,
      None => 0,
    };

    self.table.insert(key.clone(), Slot::Loading);

    let key = key.clone();
    let api = Arc::clone(&self.api);
    let table = Arc::clone(&self.table);
    let error_sink = self.error_sink.clone();
    thread::spawn(move || match fetch(&api, &key) {
      Ok(val) => {
        table.insert(key, Slot::Ready(Arc::new(val)));
      }
      Err(e) => {
        let attempts = attempts + 1;
        tracing::warn!(attempts, "fetch failed: {}", e);
        table.insert(
          key,
          Slot::Failed {
            at: Instant::now(),
            attempts,
          },
        );
        let _ = error_sink.send(e);
      }
    });

    None
  }

  #[cfg(test)]
  pub fn insert(&self, key: K, val: V) {
    self.table.insert(key, Slot::Ready(Arc::new(val)));
  }
}

/// The "Dex", which contains asynchronously-loaded data from the backend.
pub struct Dex {
  searches: Table<String, Vec<Creature>>,
  details: Table<u32, CreatureDetail>,
  pngs: Table<String, image::RgbaImage>,

  api: Arc<Api>,
}

impl Dex {
  pub fn new(api: Arc<Api>, error_sink: Sender<api::Error>) -> Self {
    Self {
      searches: Table::new(Arc::clone(&api), error_sink.clone()),
      details: Table::new(Arc::clone(&api), error_sink.clone()),
      pngs: Table::new(Arc::clone(&api), error_sink),

      api,
    }
  }

  pub fn api(&self) -> &Api {
    &self.api
  }

  /// Returns the creatures matching `term`; a blank term lists every
  /// creature.
  pub fn search(&self, term: &str) -> Option<Arc<Vec<Creature>>> {
    self
      .searches
      .get(&term.trim().to_lowercase(), |api, term| api.search_creatures(term))
  }

  pub fn detail(&self, id: u32) -> Option<Arc<CreatureDetail>> {
    self.details.get(&id, |api, &id| api.creature(id))
  }

  #[cfg(test)]
  pub fn insert_detail(&self, detail: CreatureDetail) {
    self.details.insert(detail.creature.id, detail);
  }

  pub fn load_png(&self, url: &str) -> Option<Arc<image::RgbaImage>> {
    self.pngs.get(&url.to_string(), |api, url| {
      let bytes = api.image(url)?;
      let image =
        image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)
          .map_err(|e| {
            api::Error::Io(std::io::Error::new(
              std::io::ErrorKind::InvalidData,
              format!("{}: {}", url, e),
            ))
          })?;
      Ok(image.into_rgba8())
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use std::sync::atomic::AtomicU32;
  use std::sync::atomic::Ordering;

  use pretty_assertions::assert_eq;

  use crate::testing::offline_api;

  fn eventually<T>(mut f: impl FnMut() -> Option<T>) -> T {
    let start = Instant::now();
    loop {
      if let Some(x) = f() {
        return x;
      }
      assert!(start.elapsed() < Duration::from_secs(5), "timed out");
      thread::sleep(Duration::from_millis(5));
    }
  }

  #[test]
  fn values_arrive_later() {
    let (sink, _errors) = crossbeam::channel::unbounded();
    let table = Table::<u32, u32>::new(offline_api(), sink);

    let fetch: fn(&Api, &u32) -> Result<u32, api::Error> = |_, &k| Ok(k * 2);
    let value = eventually(|| table.get(&21, fetch));
    assert_eq!(*value, 42);
  }

  #[test]
  fn errors_go_to_the_sink() {
    let (sink, errors) = crossbeam::channel::unbounded();
    let dex = Dex::new(offline_api(), sink);

    // Searching needs a session, so this fails without any network I/O.
    assert!(dex.search("pika").is_none());
    let err = errors.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(err, api::Error::Unauthenticated));

    // Failures are not retried right away.
    assert!(dex.search("  PIKA ").is_none());
    assert!(errors.recv_timeout(Duration::from_millis(100)).is_err());
  }

  #[test]
  fn failures_are_retried_later() {
    static CALLS: AtomicU32 = AtomicU32::new(0);
    let (sink, errors) = crossbeam::channel::unbounded();
    let table = Table::<u32, u32>::new(offline_api(), sink);

    let fetch: fn(&Api, &u32) -> Result<u32, api::Error> = |_, &k| {
      if CALLS.fetch_add(1, Ordering::SeqCst) == 0 {
        Err(api::Error::Unauthenticated)
      } else {
        Ok(k + 1)
      }
    };
    assert!(table.get(&1, fetch).is_none());
    let err = errors.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(err, api::Error::Unauthenticated));

    let value = eventually(|| table.get(&1, fetch));
    assert_eq!(*value, 2);
    assert_eq!(CALLS.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn retry_backoff_is_capped() {
    assert_eq!(retry_delay(1), Duration::from_millis(250));
    assert_eq!(retry_delay(3), Duration::from_secs(1));
    assert_eq!(retry_delay(40), Duration::from_secs(10));
  }
}

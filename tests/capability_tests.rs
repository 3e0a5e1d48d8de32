use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use studyagent::CapabilityProbe;

fn counting_probe(
  linked: bool
, value: Arc<Mutex<Option<String>>>
, lookups: Arc<AtomicUsize>
) -> CapabilityProbe
{   CapabilityProbe::new(
      linked
    , "OPENAI_API_KEY"
    , Arc::new(move |name: &str| {
        assert_eq!(name, "OPENAI_API_KEY");
        lookups.fetch_add(1, Ordering::SeqCst);
        value.lock().unwrap().clone()
      })
    )
}

#[test]
fn test_available_needs_linkage_and_credential()
{   let lookups = Arc::new(AtomicUsize::new(0));
    let key = Arc::new(Mutex::new(Some("sk-test".to_string())));

    assert!(counting_probe(true, key.clone(), lookups.clone())
      .is_secondary_available());
    assert!(!counting_probe(false, key, lookups.clone())
      .is_secondary_available());
    assert!(!counting_probe(true, Arc::new(Mutex::new(None)), lookups.clone())
      .is_secondary_available());
    assert!(!counting_probe(
        true
      , Arc::new(Mutex::new(Some("   ".to_string())))
      , lookups
      )
      .is_secondary_available());
}

#[test]
fn test_state_is_computed_once()
{   let lookups = Arc::new(AtomicUsize::new(0));
    let key = Arc::new(Mutex::new(None));
    let probe = counting_probe(true, key.clone(), lookups.clone());

    let first = probe.state();
    *key.lock().unwrap() = Some("sk-late".to_string());
    let second = probe.state();

    assert_eq!(first, second);
    assert!(!second.secondary_available);
    assert_eq!(lookups.load(Ordering::SeqCst), 1);
}

#[test]
fn test_invalidate_recomputes()
{   let lookups = Arc::new(AtomicUsize::new(0));
    let key = Arc::new(Mutex::new(None));
    let probe = counting_probe(true, key.clone(), lookups.clone());

    assert!(!probe.is_secondary_available());
    *key.lock().unwrap() = Some("sk-reloaded".to_string());
    probe.invalidate();

    assert!(probe.is_secondary_available());
    assert_eq!(lookups.load(Ordering::SeqCst), 2);
}

#[test]
fn test_concurrent_readers_share_one_computation()
{   let lookups = Arc::new(AtomicUsize::new(0));
    let probe = Arc::new(counting_probe(
      true
    , Arc::new(Mutex::new(Some("sk-test".to_string())))
    , lookups.clone()
    ));

    let handles: Vec<_> = (0..8)
      .map(|_| {
        let probe = probe.clone();
        std::thread::spawn(move || probe.is_secondary_available())
      })
      .collect();
    for handle in handles
    {   assert!(handle.join().unwrap());
    }
    assert_eq!(lookups.load(Ordering::SeqCst), 1);
}

#[test]
fn test_global_probe_is_shared()
{   let a = CapabilityProbe::global();
    let b = CapabilityProbe::global();
    assert!(Arc::ptr_eq(&a, &b));
}

use concise_ioc::{constructor, Component, Constructor, Container};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

static CONNECTIONS_OPENED: AtomicUsize = AtomicUsize::new(0);

struct ConnectionPool {
  id: usize,
}
impl Component for ConnectionPool {
  fn constructors() -> Vec<Constructor<Self>> {
    vec![constructor!(|| {
      let id = CONNECTIONS_OPENED.fetch_add(1, Ordering::SeqCst) + 1;
      println!("Opening connection pool #{}", id);
      ConnectionPool { id }
    })]
  }
}

fn main() {
  let container = Arc::new(Container::new());
  container.register_singleton::<ConnectionPool, ConnectionPool>();

  // Eight threads race to resolve the pool; only one constructs it.
  let handles: Vec<_> = (0..8)
    .map(|_| {
      let container = Arc::clone(&container);
      thread::spawn(move || container.resolve::<ConnectionPool>().map(|pool| pool.id))
    })
    .collect();

  for handle in handles {
    match handle.join() {
      Ok(Ok(id)) => println!("Resolved pool #{}", id),
      Ok(Err(err)) => eprintln!("Resolution failed: {}", err),
      Err(_) => eprintln!("Worker panicked"),
    }
  }

  println!(
    "Pools opened: {}",
    CONNECTIONS_OPENED.load(Ordering::SeqCst)
  );
}

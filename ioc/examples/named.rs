use concise_ioc::{FactoryRegistry, Result};

struct Endpoint {
  url: String,
}

fn main() -> Result<()> {
  let registry = FactoryRegistry::new();

  // Register two values of the same type under different names.
  registry.add_instance_with_name("primary", String::from("https://primary.example"));
  registry.add_instance_with_name("fallback", String::from("https://fallback.example"));

  // Factories receive the registry and resolve their own dependencies.
  registry.add_transient(|r| {
    let base = r.get::<String>(Some("primary"))?;
    Ok(Endpoint {
      url: format!("{}/health", base),
    })
  });

  let endpoint = registry.get::<Endpoint>(None)?;
  let fallback = registry.get::<String>(Some("fallback"))?;

  println!("Health check: {}", endpoint.url);
  println!("Fallback: {}", fallback);
  Ok(())
}

//! Wiring a small application with both vial containers.

use std::sync::Arc;
use std::time::Duration;

use vial::prelude::*;

// === Define your traits and types ===

trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

struct Config {
    database_url: String,
    debug: bool,
}

struct Database {
    url: String,
    logger: Arc<Arc<dyn Logger>>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.url)
    }
}

impl Injectable for Database {
    fn constructor() -> Option<Constructor<Self>> {
        Some(
            Constructor::new(|args| {
                let config: Arc<Config> = args.next()?;
                Ok(Database {
                    url: config.database_url.clone(),
                    logger: args.next()?,
                })
            })
            .param::<Config>()
            .param::<Arc<dyn Logger>>(),
        )
    }
}

struct UserService {
    db: Arc<Database>,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

impl Injectable for UserService {
    fn constructor() -> Option<Constructor<Self>> {
        Some(Constructor::new(|args| Ok(UserService { db: args.next()? })).param::<Database>())
    }
}

// === A module groups related providers ===

struct InfrastructureModule {
    database_url: String,
}

impl InfrastructureModule {
    fn config(&self) -> Option<Config> {
        Some(Config {
            database_url: self.database_url.clone(),
            debug: true,
        })
    }

    fn logger(&self) -> Option<Arc<dyn Logger>> {
        Some(Arc::new(ConsoleLogger))
    }
}

impl Module for InfrastructureModule {
    fn provider_methods(self: Arc<Self>) -> Vec<ProviderMethod> {
        vec![
            ProviderMethod::new(&self, "config", Self::config),
            ProviderMethod::new(&self, "logger", Self::logger).singleton(),
        ]
    }
}

fn infrastructure() -> InfrastructureModule {
    InfrastructureModule {
        database_url: "postgres://localhost/myapp".to_string(),
    }
}

fn run_sync() -> Result<()> {
    let mut container = SyncContainer::new();
    container
        .load_module(infrastructure())
        .register_injectable::<Database>(Scope::Singleton);

    println!("{container:?}");

    let config: Arc<Config> = container.resolve()?;
    println!("Config: database_url={}, debug={}", config.database_url, config.debug);

    // UserService is not registered; inject builds a fresh one each call.
    let service = container.inject::<UserService>()?;
    println!("{}", service.get_user(42));

    Ok(())
}

async fn run_async() -> Result<()> {
    let container = AsyncContainer::new();
    container
        .load_module(infrastructure())
        .register_with(
            |container: AsyncContainer| async move {
                // Slow connection setup; concurrent resolvers share it.
                tokio::time::sleep(Duration::from_millis(50)).await;
                container.inject::<Database>().await
            },
            Scope::Singleton,
        )
        .register_injectable::<UserService>(Scope::Transient);

    let (a, b) = tokio::join!(
        container.resolve::<UserService>(),
        container.resolve::<UserService>()
    );
    let (a, b) = (a?, b?);
    println!("Shared database: {}", Arc::ptr_eq(&a.db, &b.db));
    println!("{}", a.get_user(7));

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("vial_container=debug")
        .init();

    run_sync()?;
    run_async().await?;

    println!("Everything works!");
    Ok(())
}

//! THE CORE logs via `tracing`. This installs a `tracing_subscriber`
//! subscriber and checks the system comes up and shuts down cleanly
//! while it's installed: actor creation, a restart, and a dead letter
//! should all log through it without panicking.

use std::sync::Arc;
use std::time::Duration;

use kestrel::prelude::*;
use tracing_subscriber::EnvFilter;

fn install_test_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("kestrel=debug"))
        .with_test_writer()
        .try_init();
}

#[test]
fn system_runs_with_a_tracing_subscriber_installed() {
    install_test_subscriber();

    let sys = ActorSystem::create(Settings::default());

    struct Noop;
    impl Actor for Noop {
        fn receive(&mut self, _ctx: &Context, _msg: Message) {}
    }

    let actor = sys.add_actor(Arc::new(|| Box::new(Noop) as Box<dyn Actor>), "logged-actor").unwrap();
    sys.send(actor, Message::new((), 0));
    std::thread::sleep(Duration::from_millis(50));

    // An unroutable send should log a dead letter without panicking.
    sys.stop(actor);
    std::thread::sleep(Duration::from_millis(100));
    sys.send(actor, Message::new((), 0));
    std::thread::sleep(Duration::from_millis(50));

    sys.shutdown(true);
}

#[test]
fn settings_load_falls_back_to_defaults_without_a_config_file() {
    install_test_subscriber();

    std::env::set_var("KESTREL_CONF", "does/not/exist.toml");
    std::env::set_var("KESTREL_APP_CONF", "also/does/not/exist.toml");
    let settings = kestrel::config::load_config().expect("missing config files fall back to defaults");
    assert_eq!(settings.parallelism, Settings::default().parallelism);
}

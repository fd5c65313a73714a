fn main() {
    if let Err(err) = week_events_lib::run() {
        tracing::error!("{err:#}");
        std::process::exit(1);
    }
}

use dockrun_shared::constants::run::DEFAULT_IMAGE_TAG;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Install a stderr tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` (e.g. `"info"`)
/// is used. Calling this more than once is harmless.
pub fn init_logging(default_directive: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init();
}

/// Split an image reference into repository and tag (or digest).
///
/// References without a tag resolve to `latest`, so a pull fetches one
/// image rather than every tag of the repository.
pub fn split_image_reference(image: &str) -> (&str, &str) {
    if let Some((repository, digest)) = image.split_once('@') {
        return (repository, digest);
    }

    // A ':' before the last '/' belongs to a registry port, not a tag.
    let name_start = image.rfind('/').map(|i| i + 1).unwrap_or(0);
    match image[name_start..].rfind(':') {
        Some(offset) => {
            let split = name_start + offset;
            (&image[..split], &image[split + 1..])
        }
        None => (image, DEFAULT_IMAGE_TAG),
    }
}

pub struct Instancebake {}

static INSTANCEBAKE_STATIC: std::sync::OnceLock<InstancebakeStatic> = std::sync::OnceLock::new();

struct InstancebakeStatic {}

impl InstancebakeStatic {
    fn init(_app_name: &str) -> &'static Self {
        INSTANCEBAKE_STATIC.get_or_init(|| {
            env_logger::builder()
                .filter_level(log::LevelFilter::Info)
                .parse_default_env()
                .init();

            Self {}
        })
    }
}

impl Instancebake {
    pub fn new(app_name: &str) -> Self {
        InstancebakeStatic::init(app_name);

        Self {}
    }
}

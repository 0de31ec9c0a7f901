use std::num::NonZero;

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Defaults to the number of CPU cores.
    #[serde(deserialize_with = "deserialize_non_zero")]
    pub worker_threads: Option<NonZero<usize>>,
}

fn deserialize_non_zero<'de, D>(deserializer: D) -> Result<Option<NonZero<usize>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    <Option<usize> as serde::Deserialize<'de>>::deserialize(deserializer)
        .map(|value| value.and_then(NonZero::new))
}

use std::env;
use std::str::FromStr;
use tracing::warn;

pub struct Environment;

impl Environment {
    pub fn string(
        env_name: &str,
        default: &str,
    ) -> String {
        env::var(env_name).ok().unwrap_or(default.to_string())
    }

    pub fn optional_string(env_name: &str) -> Option<String> {
        env::var(env_name).ok().filter(|value| !value.trim().is_empty())
    }

    pub fn u32(
        env_name: &str,
        default: u32,
    ) -> u32 {
        Self::parse(env_name, default)
    }

    pub fn u64(
        env_name: &str,
        default: u64,
    ) -> u64 {
        Self::parse(env_name, default)
    }

    pub fn usize(
        env_name: &str,
        default: usize,
    ) -> usize {
        Self::parse(env_name, default)
    }

    pub fn u16(
        env_name: &str,
        default: u16,
    ) -> u16 {
        Self::parse(env_name, default)
    }

    fn parse<T>(
        env_name: &str,
        default: T,
    ) -> T
    where
        T: FromStr + Copy,
    {
        match env::var(env_name) {
            Ok(value) => value.trim().parse::<T>().unwrap_or_else(|_| {
                warn!("Ignoring invalid value '{}' for {}, using default", value, env_name);
                default
            }),
            Err(_) => default,
        }
    }
}

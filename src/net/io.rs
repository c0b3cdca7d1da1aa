//! I/O 支持：网与级联报告的 JSON、RON 序列化接口。
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use ron::ser::PrettyConfig;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),
    #[error("ron parse error: {0}")]
    RonSpanned(#[from] ron::error::SpannedError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn to_json_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn from_json_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_str(s)?)
}

pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), IoError> {
    let mut file = File::create(path)?;
    let content = to_json_string(value)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub fn read_json<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T, IoError> {
    from_json_str(&read_to_string(path)?)
}

pub fn to_ron_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    let mut pretty = PrettyConfig::default();
    pretty.new_line = "\n".into();
    Ok(ron::ser::to_string_pretty(value, pretty)?)
}

pub fn from_ron_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(ron::from_str(s)?)
}

pub fn write_ron<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), IoError> {
    let mut file = File::create(path)?;
    let content = to_ron_string(value)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub fn read_ron<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T, IoError> {
    from_ron_str(&read_to_string(path)?)
}

fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String, IoError> {
    let mut file = File::open(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{GateKind, Net, Place, Transition};

    fn sample() -> Net {
        let mut net = Net::empty();
        let a = net.add_place(Place::root("A"));
        let b = net.add_place(Place::new("B"));
        let t = net.add_transition(Transition::new("T1", GateKind::Single));
        net.add_input_arc(a, t);
        net.add_output_arc(b, t);
        net
    }

    #[test]
    fn net_survives_json() {
        let net = sample();
        let text = to_json_string(&net).unwrap();
        let back: Net = from_json_str(&text).unwrap();

        assert_eq!(back.place_id("B"), net.place_id("B"));
        assert_eq!(back.arcs(), net.arcs());
    }

    #[test]
    fn net_file_survives_ron() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.ron");
        write_ron(&path, &sample()).unwrap();
        let back: Net = read_ron(&path).unwrap();

        assert_eq!(back.transitions_len(), 1);
        assert!(back.places[back.place_id("A").unwrap()].root);
    }

    #[test]
    fn malformed_ron_is_an_error_not_a_panic() {
        let parsed: Result<Net, _> = from_ron_str("(places: [");
        assert!(matches!(parsed, Err(IoError::RonSpanned(_))));
    }
}

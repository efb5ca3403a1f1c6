/// A trait to extend functionality for types that can be represented as "on" or "off" strings.
pub trait OnOffExt {
    fn as_on_off_str(&self) -> &'static str;
}

/// Extension trait for the `bool` type to provide a method for converting
/// the boolean value to a string representation of "on" or "off".
///
/// # Examples
///
/// ```
/// use thermosim::util::OnOffExt;
///
/// assert_eq!(true.as_on_off_str(), "on");
/// assert_eq!(false.as_on_off_str(), "off");
/// ```
impl OnOffExt for bool {
    fn as_on_off_str(&self) -> &'static str {
        if *self {
            "on"
        } else {
            "off"
        }
    }
}

/// Sibling path used to stage a file before it is moved into place.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use thermosim::util::staging_path;
///
/// assert_eq!(staging_path(Path::new("out/readings.json")), Path::new("out/readings.json.tmp"));
/// ```
pub fn staging_path(path: &std::path::Path) -> std::path::PathBuf {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    staging.into()
}

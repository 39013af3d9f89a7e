/// Build a `PathBuf` out of any number of components.
///
/// ```
/// use std::path::PathBuf;
/// use pegasus_common::makepath;
///
/// let p: PathBuf = makepath!("/home", "pegasus", ".config");
/// assert_eq!(PathBuf::from("/home/pegasus/.config"), p);
/// ```
///
#[macro_export]
macro_rules! makepath {
    ($($item:expr),+) => {
        [
        $(::std::path::PathBuf::from($item),)+
        ]
        .iter()
        .collect::<::std::path::PathBuf>()
    };
}

/// The type of callback functions to call when warnings are raised while reading a ground program.
///
/// The first parameter is the index of the line the warning is related to.
pub type WarningHandler = Box<dyn Fn(usize, String)>;

//! JavaScript snippets executed through [`crate::Driver::execute_script`]

/// Widest of the document's width metrics
pub const CONTENT_WIDTH: &str = "return Math.max(document.body.scrollWidth, document.body.offsetWidth, \
     document.documentElement.clientWidth, document.documentElement.scrollWidth, \
     document.documentElement.offsetWidth);";

/// Tallest of the document's height metrics
pub const CONTENT_HEIGHT: &str = "return Math.max(document.body.scrollHeight, document.body.offsetHeight, \
     document.documentElement.clientHeight, document.documentElement.scrollHeight, \
     document.documentElement.offsetHeight);";

/// `arguments[0]`: scroll container
pub const ELEMENT_CONTENT_HEIGHT: &str = "return arguments[0].scrollHeight;";

pub const VIEWPORT_SIZE: &str =
    "return {\"width\": window.innerWidth, \"height\": window.innerHeight};";

/// `arguments[0..2]`: x, y
pub const WINDOW_SCROLL_TO: &str = "window.scrollTo(arguments[0], arguments[1]);";

/// `arguments[0]`: scroll container, `arguments[1..3]`: x, y
pub const ELEMENT_SCROLL_TO: &str = "arguments[0].scrollTo(arguments[1], arguments[2]);";

pub const WINDOW_SCROLL_OFFSET: &str =
    "return {\"x\": window.pageXOffset, \"y\": window.pageYOffset};";

/// `arguments[0]`: scroll container
pub const ELEMENT_SCROLL_OFFSET: &str =
    "return {\"x\": arguments[0].scrollLeft, \"y\": arguments[0].scrollTop};";

/// `arguments[0]`: element, `arguments[1..3]`: width, height, `arguments[3]`: colour
pub const MASK_ELEMENT: &str = "var ele = arguments[0]; \
     ele.innerHTML = '<div style=\"text-align:center; width:' + arguments[1] + 'px; height:' \
     + arguments[2] + 'px; background-color:' + arguments[3] + '; color:black\"></div>';";

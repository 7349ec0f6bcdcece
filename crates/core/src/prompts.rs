pub const INTERPRETER_SYSTEM_PROMPT: &str =
    "You are a middleware between user and google maps API.";

pub const SUMMARIZER_SYSTEM_PROMPT: &str = "You will be given a prompt and a JSON response related to it.
You need to sum those up in a human readable form in HTML.
Need only the body of the html, do not include head, title, etc.
This will be rendered unsafely in a browser, so make sure to not include any scripts to prevent XSS.
Assume the content will be displayed on a muted light gray background.
Include styles inline and do not include external stylesheets. Styling should be minimalistic and professional.
Do not include any custom fonts.
If there are any lists, they should be styled in a bullet format.";

/// Both values are embedded verbatim. Nothing is escaped here; the HTML that comes
/// back is rendered unsanitised by the caller, so script filtering relies on the
/// system prompt alone.
pub fn summarizer_user_prompt(user_input: &str, location_response: &str) -> String {
    format!("Prompt: {user_input}\nJSON: {location_response}")
}

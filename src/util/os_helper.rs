/// Author used by the admin tool when none is given: real name, then login name.
pub fn default_author() -> String {
    let name = whoami::realname();
    if name.trim().is_empty() {
        return whoami::username();
    }
    name
}

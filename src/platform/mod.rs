//! OS-specific file modes, ownership checks and durable writes, exposed under
//! one set of names.

mod temp;
#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

pub use temp::tmp_sibling_name;

#[cfg(unix)]
pub use unix::{
    available_space, open_log_file_secure_append, owner_is_root, set_dir_mode_0700,
    set_file_mode_0600, write_config_secure_new_0600,
};

#[cfg(not(unix))]
pub use windows::{
    available_space, open_log_file_secure_append, owner_is_root, relax_permissions,
    set_dir_mode_0700, set_file_mode_0600, write_config_secure_new_0600,
};

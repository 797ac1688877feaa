mod init;
mod user;

pub use init::cmd_init;
pub use user::{
    cmd_user_create, cmd_user_delete, cmd_user_list, cmd_user_passwd, cmd_user_rotate_key,
    cmd_user_show, cmd_user_verify, read_password,
};

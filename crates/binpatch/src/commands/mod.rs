pub mod init;
pub mod patch_apply;
pub mod patch_create;
pub mod patch_rollback;
pub mod run;
pub mod status;

pub mod home_dir;

pub mod goodday;

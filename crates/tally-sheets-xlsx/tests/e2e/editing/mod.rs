mod package;
mod shared_strings;
mod worksheet;

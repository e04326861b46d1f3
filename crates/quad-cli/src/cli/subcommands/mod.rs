mod viewport;

pub use viewport::ViewportCommands;

mod application;
mod presentation;

use bankmig_core::error::Result;

fn main() -> Result<()> {
    application::run()
}

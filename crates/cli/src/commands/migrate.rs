use crate::commands::{
    block_on, finish, load_config, open_database, CommandFailure, CommandResult,
};

pub fn run() -> CommandResult {
    finish(
        "migrate",
        load_config().and_then(|config| {
            block_on(async {
                let pool = open_database(&config).await?;
                pool.close().await;
                Ok::<_, CommandFailure>(CommandResult::success("migrate", "applied pending migrations"))
            })
        }),
    )
}

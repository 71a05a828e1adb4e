// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use barrel::backend::Pg;
use barrel::{types, Migration};

pub fn migration() -> String {
    let mut migr = Migration::new();

    migr.create_table("rsvps", |table| {
        // Supplied by the client, identifies the participant
        table.add_column("id", types::varchar(255).primary(true));
        table.add_column("name", types::varchar(255).nullable(false));
        table.add_column("email", types::varchar(255).nullable(false));
        table.add_column("status", types::varchar(5).nullable(false));
        table.inject_custom("CONSTRAINT rsvps_status_check CHECK (status IN ('Yes', 'No', 'Maybe'))");
    });

    migr.make::<Pg>()
}

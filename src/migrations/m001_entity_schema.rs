//! Entity table: nodes and relation-entities in one tagged table.

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::AppError;
use crate::migrations::Migration;
use crate::store::SqlExecutor;

pub struct M001EntitySchema;

impl Migration for M001EntitySchema {
    fn id(&self) -> &'static str {
        "m001_entity_schema"
    }

    fn version(&self) -> u32 {
        1
    }

    fn description(&self) -> &'static str {
        "Entity table with signature check and natural key"
    }

    fn up<'a>(&'a self, ctx: &'a (dyn SqlExecutor + Sync)) -> BoxFuture<'a, Result<(), AppError>> {
        async move {
            // NULLS NOT DISTINCT needs PostgreSQL 15+.
            ctx.execute_sql(
                r#"
                CREATE TABLE IF NOT EXISTS entity (
                    id BIGSERIAL PRIMARY KEY,
                    name TEXT NOT NULL,
                    parent_id BIGINT REFERENCES entity (id) ON DELETE CASCADE,
                    struct_type TEXT NOT NULL
                        CHECK (struct_type IN ('canonical', 'class', 'relation', 'instance')),
                    entity_type TEXT
                        CHECK (entity_type IN ('person', 'organization', 'place', 'time',
                            'value', 'document', 'event', 'role', 'unknown')),
                    domain_entity_type TEXT
                        CHECK (domain_entity_type IN ('person', 'organization', 'place', 'time',
                            'value', 'document', 'event', 'role', 'unknown')),
                    range_entity_type TEXT
                        CHECK (range_entity_type IN ('person', 'organization', 'place', 'time',
                            'value', 'document', 'event', 'role', 'unknown')),
                    meta JSONB NOT NULL DEFAULT '{}'::jsonb,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                    CONSTRAINT ck_entity_relation_signature_fields CHECK (
                        (struct_type = 'relation'
                            AND entity_type IS NULL
                            AND domain_entity_type IS NOT NULL
                            AND range_entity_type IS NOT NULL)
                        OR
                        (struct_type <> 'relation'
                            AND domain_entity_type IS NULL
                            AND range_entity_type IS NULL)
                    ),
                    CONSTRAINT uq_entity_name_struct_type_entity_type
                        UNIQUE NULLS NOT DISTINCT (name, struct_type, entity_type)
                );

                CREATE INDEX IF NOT EXISTS entity_parent_id_idx ON entity (parent_id);
                CREATE INDEX IF NOT EXISTS entity_struct_type_idx ON entity (struct_type);
                CREATE INDEX IF NOT EXISTS entity_entity_type_idx ON entity (entity_type);
                "#,
            )
            .await?;

            Ok(())
        }
        .boxed()
    }
}

pub const QUERY_GET_ACTIVE_RULES: &str = r#"
SELECT
    id,text,mode,rule_type,result,active,scope_instance_id,created_at
FROM rule
WHERE
    active=1 AND
    (scope_instance_id IS NULL OR scope_instance_id=$1)
ORDER BY id;
"#;

pub const QUERY_GET_ALL_RULES: &str = r#"
SELECT
    id,text,mode,rule_type,result,active,scope_instance_id,created_at
FROM rule
ORDER BY id;
"#;

pub const QUERY_INSERT_RULE: &str = r#"
INSERT INTO rule(
    text,mode,rule_type,result,active,scope_instance_id,created_at
) VALUES($1,$2,$3,$4,$5,$6,$7)
RETURNING id,text,mode,rule_type,result,active,scope_instance_id,created_at;
"#;

// $4 is the status of a new row, $7 the matched status (NULL keeps the stored one)
pub const QUERY_UPSERT_CONVERSATION_UNSCOPED: &str = r#"
INSERT INTO conversation(
    phone,name,origin,status,last_message,instance_id,created_at,updated_at
) VALUES($1,$2,$3,$4,$5,NULL,$6,$6)
ON CONFLICT(phone) WHERE instance_id IS NULL DO UPDATE SET
    name=COALESCE(conversation.name,excluded.name),
    origin=COALESCE(conversation.origin,excluded.origin),
    status=COALESCE($7,conversation.status),
    last_message=COALESCE(excluded.last_message,conversation.last_message),
    updated_at=excluded.updated_at
RETURNING id;
"#;

pub const QUERY_UPSERT_CONVERSATION_SCOPED: &str = r#"
INSERT INTO conversation(
    phone,name,origin,status,last_message,instance_id,created_at,updated_at
) VALUES($1,$2,$3,$4,$5,$8,$6,$6)
ON CONFLICT(phone,instance_id) WHERE instance_id IS NOT NULL DO UPDATE SET
    name=COALESCE(conversation.name,excluded.name),
    origin=COALESCE(conversation.origin,excluded.origin),
    status=COALESCE($7,conversation.status),
    last_message=COALESCE(excluded.last_message,conversation.last_message),
    updated_at=excluded.updated_at
RETURNING id;
"#;

pub const QUERY_GET_CONVERSATION: &str = r#"
SELECT
    id,phone,name,origin,status,last_message,instance_id,created_at,updated_at
FROM conversation
WHERE
    phone=$1 AND
    instance_id IS $2;
"#;

pub const QUERY_GET_RECENT_CONVERSATIONS: &str = r#"
SELECT
    id,phone,name,origin,status,last_message,instance_id,created_at,updated_at
FROM conversation
ORDER BY updated_at DESC, id DESC
LIMIT $1;
"#;

pub const QUERY_INSERT_MESSAGE: &str = r#"
INSERT INTO message(
    conversation_id,phone,body,direction,instance_id,provider_message_id,created_at
) VALUES($1,$2,$3,$4,$5,$6,$7);
"#;

pub const QUERY_GET_OR_CREATE_INSTANCE: &str = r#"
INSERT INTO instance(name,message_template,ref_tag,created_at,updated_at)
VALUES($1,'',$2,$3,$3)
ON CONFLICT(name) DO UPDATE SET name=excluded.name
RETURNING id;
"#;

pub const QUERY_SAVE_INSTANCE: &str = r#"
INSERT INTO instance(name,phone,message_template,ref_tag,created_at,updated_at)
VALUES($1,$2,$3,$4,$5,$5)
ON CONFLICT(name) DO UPDATE SET
    phone=excluded.phone,
    message_template=excluded.message_template,
    ref_tag=excluded.ref_tag,
    updated_at=excluded.updated_at
RETURNING id;
"#;

pub const QUERY_GET_INSTANCES: &str = r#"
SELECT
    id,name,phone,message_template,ref_tag,clicks,created_at,updated_at
FROM instance
ORDER BY name;
"#;

pub const QUERY_REGISTER_INSTANCE_CLICK: &str = r#"
UPDATE instance SET
    clicks=clicks+1,
    updated_at=$2
WHERE name=$1
RETURNING id,name,phone,message_template,ref_tag,clicks,created_at,updated_at;
"#;

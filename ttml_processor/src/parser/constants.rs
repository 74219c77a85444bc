//! 解析时匹配的元素名、属性名与属性值。

pub(super) const TAG_METADATA: &[u8] = b"metadata";
pub(super) const TAG_BODY: &[u8] = b"body";
pub(super) const TAG_P: &[u8] = b"p";
pub(super) const TAG_SPAN: &[u8] = b"span";

pub(super) const TAG_AGENT: &[u8] = b"agent";
pub(super) const TAG_AGENT_TTM: &[u8] = b"ttm:agent";
pub(super) const TAG_META: &[u8] = b"meta";
pub(super) const TAG_META_AMLL: &[u8] = b"amll:meta";
pub(super) const TAG_ITUNES_METADATA: &[u8] = b"iTunesMetadata";
pub(super) const TAG_SONGWRITER: &[u8] = b"songwriter";
pub(super) const TAG_TRANSLATIONS: &[u8] = b"translations";
pub(super) const TAG_TRANSLITERATIONS: &[u8] = b"transliterations";
pub(super) const TAG_TRANSLATION: &[u8] = b"translation";
pub(super) const TAG_TRANSLITERATION: &[u8] = b"transliteration";
pub(super) const TAG_TEXT: &[u8] = b"text";

pub(super) const ATTR_BEGIN: &[u8] = b"begin";
pub(super) const ATTR_END: &[u8] = b"end";
pub(super) const ATTR_AGENT: &[u8] = b"ttm:agent";
pub(super) const ATTR_AGENT_ALIAS: &[u8] = b"agent";
pub(super) const ATTR_ITUNES_KEY: &[u8] = b"itunes:key";
pub(super) const ATTR_ROLE: &[u8] = b"ttm:role";
pub(super) const ATTR_ROLE_ALIAS: &[u8] = b"role";
pub(super) const ATTR_TYPE: &[u8] = b"type";
pub(super) const ATTR_XML_ID: &[u8] = b"xml:id";
pub(super) const ATTR_KEY: &[u8] = b"key";
pub(super) const ATTR_VALUE: &[u8] = b"value";
pub(super) const ATTR_FOR: &[u8] = b"for";
pub(super) const ATTR_EMPTY_BEAT: &[u8] = b"amll:empty-beat";
pub(super) const ATTR_EMPTY_BEAT_ALIAS: &[u8] = b"empty-beat";
pub(super) const ATTR_OBSCENE: &[u8] = b"amll:obscene";
pub(super) const ATTR_OBSCENE_ALIAS: &[u8] = b"obscene";

pub(super) const AGENT_TYPE_PERSON: &str = "person";
pub(super) const SONGWRITER_KEY: &str = "songwriter";

pub(super) const ROLE_TRANSLATION: &[u8] = b"x-translation";
pub(super) const ROLE_ROMANIZATION: &[u8] = b"x-roman";
pub(super) const ROLE_BACKGROUND: &[u8] = b"x-bg";

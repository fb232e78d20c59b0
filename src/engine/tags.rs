//! Байты управляющих опкодов и тегов типов значений в дампе.
//!
//! Опкоды занимают верх диапазона (`0xF4..=0xFF`), теги типов — низ
//! (`0..=25`). Всё, что не перечислено здесь, считается неподдерживаемой
//! кодировкой.

/// Сигнатура в начале файла.
pub const RDB_MAGIC: &[u8; 5] = b"REDIS";
/// Самая новая версия формата, которую декодер знает.
pub const RDB_VERSION_MAX: u32 = 12;
/// Начиная с этой версии после `EOF` идёт CRC-64.
pub const RDB_VERSION_CHECKSUM: u32 = 5;

// Управляющие опкоды

/// Слоты кластера (три длины, пропускаются)
pub const OP_SLOT_INFO: u8 = 0xF4;
/// Библиотека функций (одна строка, пропускается)
pub const OP_FUNCTION2: u8 = 0xF5;
/// Функции до GA-формата (не поддерживается)
pub const OP_FUNCTION_PRE_GA: u8 = 0xF6;
/// Вспомогательные данные модуля (не поддерживается)
pub const OP_MODULE_AUX: u8 = 0xF7;
/// Время простоя ключа в секундах
pub const OP_IDLE: u8 = 0xF8;
/// Счётчик частоты LFU
pub const OP_FREQ: u8 = 0xF9;
/// Вспомогательное поле (две строки)
pub const OP_AUX: u8 = 0xFA;
/// Подсказка размеров базы (две длины)
pub const OP_RESIZEDB: u8 = 0xFB;
/// Срок жизни в миллисекундах (8 байт LE)
pub const OP_EXPIRETIME_MS: u8 = 0xFC;
/// Срок жизни в секундах (4 байта LE)
pub const OP_EXPIRETIME: u8 = 0xFD;
/// Выбор базы данных
pub const OP_SELECTDB: u8 = 0xFE;
/// Конец дампа
pub const OP_EOF: u8 = 0xFF;

// Теги типов значений

pub const TYPE_STRING: u8 = 0;
pub const TYPE_LIST: u8 = 1;
pub const TYPE_SET: u8 = 2;
/// Упорядоченное множество со строковыми оценками
pub const TYPE_ZSET: u8 = 3;
pub const TYPE_HASH: u8 = 4;
/// Упорядоченное множество с бинарными оценками `f64`
pub const TYPE_ZSET_2: u8 = 5;
pub const TYPE_MODULE_PRE_GA: u8 = 6;
pub const TYPE_MODULE_2: u8 = 7;
pub const TYPE_HASH_ZIPMAP: u8 = 9;
pub const TYPE_LIST_ZIPLIST: u8 = 10;
pub const TYPE_SET_INTSET: u8 = 11;
pub const TYPE_ZSET_ZIPLIST: u8 = 12;
pub const TYPE_HASH_ZIPLIST: u8 = 13;
pub const TYPE_LIST_QUICKLIST: u8 = 14;
pub const TYPE_STREAM_LISTPACKS: u8 = 15;
pub const TYPE_HASH_LISTPACK: u8 = 16;
pub const TYPE_ZSET_LISTPACK: u8 = 17;
pub const TYPE_LIST_QUICKLIST_2: u8 = 18;
pub const TYPE_STREAM_LISTPACKS_2: u8 = 19;
pub const TYPE_SET_LISTPACK: u8 = 20;
pub const TYPE_STREAM_LISTPACKS_3: u8 = 21;
/// Хеши с истечением полей (22..=25)
pub const TYPE_HASH_METADATA_PRE_GA: u8 = 22;
pub const TYPE_HASH_LISTPACK_EX_PRE_GA: u8 = 23;
pub const TYPE_HASH_METADATA: u8 = 24;
pub const TYPE_HASH_LISTPACK_EX: u8 = 25;

/// Человекочитаемое имя опкода или тега для логов.
pub fn tag_name(tag: u8) -> &'static str {
    match tag {
        OP_SLOT_INFO => "SLOT_INFO",
        OP_FUNCTION2 => "FUNCTION2",
        OP_FUNCTION_PRE_GA => "FUNCTION_PRE_GA",
        OP_MODULE_AUX => "MODULE_AUX",
        OP_IDLE => "IDLE",
        OP_FREQ => "FREQ",
        OP_AUX => "AUX",
        OP_RESIZEDB => "RESIZEDB",
        OP_EXPIRETIME_MS => "EXPIRETIME_MS",
        OP_EXPIRETIME => "EXPIRETIME",
        OP_SELECTDB => "SELECTDB",
        OP_EOF => "EOF",
        TYPE_STRING => "string",
        TYPE_LIST => "list",
        TYPE_SET => "set",
        TYPE_ZSET => "zset",
        TYPE_HASH => "hash",
        TYPE_ZSET_2 => "zset2",
        TYPE_MODULE_PRE_GA | TYPE_MODULE_2 => "module",
        TYPE_HASH_ZIPMAP => "hash_zipmap",
        TYPE_LIST_ZIPLIST => "list_ziplist",
        TYPE_SET_INTSET => "set_intset",
        TYPE_ZSET_ZIPLIST => "zset_ziplist",
        TYPE_HASH_ZIPLIST => "hash_ziplist",
        TYPE_LIST_QUICKLIST => "list_quicklist",
        TYPE_STREAM_LISTPACKS | TYPE_STREAM_LISTPACKS_2 | TYPE_STREAM_LISTPACKS_3 => "stream",
        TYPE_HASH_LISTPACK => "hash_listpack",
        TYPE_ZSET_LISTPACK => "zset_listpack",
        TYPE_LIST_QUICKLIST_2 => "list_quicklist2",
        TYPE_SET_LISTPACK => "set_listpack",
        TYPE_HASH_METADATA_PRE_GA..=TYPE_HASH_LISTPACK_EX => "hash_with_field_expiry",
        _ => "unknown",
    }
}

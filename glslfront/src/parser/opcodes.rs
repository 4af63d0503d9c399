//! The opcode catalog.
//!
//! The opcode stream is a contract between the parser and the code generator which consumes it. Every byte value
//! the parser emits is listed here. [`REVISION`] is the first byte of every stream and must be bumped whenever the
//! meaning of the stream changes.
//!
//! Strings (identifiers, and the text of numeric literals) are emitted inline and terminated with a `0` byte.
//! Numeric literals are preceded by a `1` byte, and booleans are emitted as the bytes `2`, `'0'` or `'1'`, `0`.

/// The revision of the opcode stream format.
pub const REVISION: u8 = 5;

/* EXTERNAL DECLARATIONS */
pub const EXTERNAL_NULL: u8 = 0;
pub const EXTERNAL_FUNCTION_DEFINITION: u8 = 1;
pub const EXTERNAL_DECLARATION: u8 = 2;
pub const DEFAULT_PRECISION: u8 = 3;
pub const INVARIANT_STMT: u8 = 4;

/* PRECISION */
pub const PRECISION_DEFAULT: u8 = 0;
pub const PRECISION_LOW: u8 = 1;
pub const PRECISION_MEDIUM: u8 = 2;
pub const PRECISION_HIGH: u8 = 3;

/* DECLARATIONS */
pub const DECLARATION_FUNCTION_PROTOTYPE: u8 = 1;
pub const DECLARATION_INIT_DECLARATOR_LIST: u8 = 2;

/* FUNCTION KINDS */
pub const FUNCTION_ORDINARY: u8 = 0;
pub const FUNCTION_CONSTRUCTOR: u8 = 1;
pub const FUNCTION_OPERATOR: u8 = 2;

/* FUNCTION CALL KINDS */
pub const FUNCTION_CALL_NONARRAY: u8 = 0;
pub const FUNCTION_CALL_ARRAY: u8 = 1;

/* OVERRIDABLE OPERATORS */
// The gaps are operators which cannot be overloaded.
pub const OPERATOR_ADDASSIGN: u8 = 1;
pub const OPERATOR_SUBASSIGN: u8 = 2;
pub const OPERATOR_MULASSIGN: u8 = 3;
pub const OPERATOR_DIVASSIGN: u8 = 4;
pub const OPERATOR_LOGICALXOR: u8 = 11;
pub const OPERATOR_LESS: u8 = 15;
pub const OPERATOR_GREATER: u8 = 16;
pub const OPERATOR_LESSEQUAL: u8 = 17;
pub const OPERATOR_GREATEREQUAL: u8 = 18;
pub const OPERATOR_MULTIPLY: u8 = 21;
pub const OPERATOR_DIVIDE: u8 = 22;
pub const OPERATOR_INCREMENT: u8 = 24;
pub const OPERATOR_DECREMENT: u8 = 25;
pub const OPERATOR_PLUS: u8 = 26;
pub const OPERATOR_MINUS: u8 = 27;
pub const OPERATOR_NOT: u8 = 29;

/* INIT DECLARATOR LISTS */
pub const DECLARATOR_NONE: u8 = 0;
pub const DECLARATOR_NEXT: u8 = 1;

/* VARIABLE DECLARATIONS */
pub const VARIABLE_NONE: u8 = 0;
pub const VARIABLE_IDENTIFIER: u8 = 1;
pub const VARIABLE_INITIALIZER: u8 = 2;
pub const VARIABLE_ARRAY_EXPLICIT: u8 = 3;
pub const VARIABLE_ARRAY_UNKNOWN: u8 = 4;

/* TYPE QUALIFIERS */
pub const TYPE_QUALIFIER_NONE: u8 = 0;
pub const TYPE_QUALIFIER_CONST: u8 = 1;
pub const TYPE_QUALIFIER_ATTRIBUTE: u8 = 2;
pub const TYPE_QUALIFIER_VARYING: u8 = 3;
pub const TYPE_QUALIFIER_UNIFORM: u8 = 4;
pub const TYPE_QUALIFIER_FIXEDOUTPUT: u8 = 5;
pub const TYPE_QUALIFIER_FIXEDINPUT: u8 = 6;

/* INVARIANCE */
pub const TYPE_VARIANT: u8 = 90;
pub const TYPE_INVARIANT: u8 = 91;

/* CENTROID */
pub const TYPE_CENTER: u8 = 95;
pub const TYPE_CENTROID: u8 = 96;

/* LAYOUT QUALIFIERS */
pub const LAYOUT_QUALIFIER_NONE: u8 = 0;
pub const LAYOUT_QUALIFIER_UPPER_LEFT: u8 = 1;
pub const LAYOUT_QUALIFIER_PIXEL_CENTER_INTEGER: u8 = 2;

/* TYPE SPECIFIERS */
pub const TYPE_SPECIFIER_VOID: u8 = 0;
pub const TYPE_SPECIFIER_BOOL: u8 = 1;
pub const TYPE_SPECIFIER_BVEC2: u8 = 2;
pub const TYPE_SPECIFIER_BVEC3: u8 = 3;
pub const TYPE_SPECIFIER_BVEC4: u8 = 4;
pub const TYPE_SPECIFIER_INT: u8 = 5;
pub const TYPE_SPECIFIER_IVEC2: u8 = 6;
pub const TYPE_SPECIFIER_IVEC3: u8 = 7;
pub const TYPE_SPECIFIER_IVEC4: u8 = 8;
pub const TYPE_SPECIFIER_FLOAT: u8 = 9;
pub const TYPE_SPECIFIER_VEC2: u8 = 10;
pub const TYPE_SPECIFIER_VEC3: u8 = 11;
pub const TYPE_SPECIFIER_VEC4: u8 = 12;
pub const TYPE_SPECIFIER_MAT2: u8 = 13;
pub const TYPE_SPECIFIER_MAT3: u8 = 14;
pub const TYPE_SPECIFIER_MAT4: u8 = 15;
pub const TYPE_SPECIFIER_SAMPLER1D: u8 = 16;
pub const TYPE_SPECIFIER_SAMPLER2D: u8 = 17;
pub const TYPE_SPECIFIER_SAMPLER3D: u8 = 18;
pub const TYPE_SPECIFIER_SAMPLERCUBE: u8 = 19;
pub const TYPE_SPECIFIER_SAMPLER1DSHADOW: u8 = 20;
pub const TYPE_SPECIFIER_SAMPLER2DSHADOW: u8 = 21;
pub const TYPE_SPECIFIER_SAMPLER2DRECT: u8 = 22;
pub const TYPE_SPECIFIER_SAMPLER2DRECTSHADOW: u8 = 23;
pub const TYPE_SPECIFIER_STRUCT: u8 = 24;
pub const TYPE_SPECIFIER_TYPENAME: u8 = 25;
pub const TYPE_SPECIFIER_MAT23: u8 = 26;
pub const TYPE_SPECIFIER_MAT32: u8 = 27;
pub const TYPE_SPECIFIER_MAT24: u8 = 28;
pub const TYPE_SPECIFIER_MAT42: u8 = 29;
pub const TYPE_SPECIFIER_MAT34: u8 = 30;
pub const TYPE_SPECIFIER_MAT43: u8 = 31;
pub const TYPE_SPECIFIER_SAMPLER_1D_ARRAY: u8 = 32;
pub const TYPE_SPECIFIER_SAMPLER_2D_ARRAY: u8 = 33;
pub const TYPE_SPECIFIER_SAMPLER_1D_ARRAY_SHADOW: u8 = 34;
pub const TYPE_SPECIFIER_SAMPLER_2D_ARRAY_SHADOW: u8 = 35;

/* TYPE SPECIFIER ARRAYNESS */
pub const TYPE_SPECIFIER_NONARRAY: u8 = 0;
pub const TYPE_SPECIFIER_ARRAY: u8 = 1;

/* STRUCT FIELDS */
pub const FIELD_NONE: u8 = 0;
pub const FIELD_NEXT: u8 = 1;
pub const FIELD_ARRAY: u8 = 2;

/* OPERATIONS */
pub const OP_END: u8 = 0;
pub const OP_BLOCK_BEGIN_NO_NEW_SCOPE: u8 = 1;
pub const OP_BLOCK_BEGIN_NEW_SCOPE: u8 = 2;
pub const OP_DECLARE: u8 = 3;
pub const OP_ASM: u8 = 4;
pub const OP_BREAK: u8 = 5;
pub const OP_CONTINUE: u8 = 6;
pub const OP_DISCARD: u8 = 7;
pub const OP_RETURN: u8 = 8;
pub const OP_EXPRESSION: u8 = 9;
pub const OP_IF: u8 = 10;
pub const OP_WHILE: u8 = 11;
pub const OP_DO: u8 = 12;
pub const OP_FOR: u8 = 13;
pub const OP_PUSH_VOID: u8 = 14;
pub const OP_PUSH_BOOL: u8 = 15;
pub const OP_PUSH_INT: u8 = 16;
pub const OP_PUSH_FLOAT: u8 = 17;
pub const OP_PUSH_IDENTIFIER: u8 = 18;
pub const OP_SEQUENCE: u8 = 19;
pub const OP_ASSIGN: u8 = 20;
pub const OP_ADDASSIGN: u8 = 21;
pub const OP_SUBASSIGN: u8 = 22;
pub const OP_MULASSIGN: u8 = 23;
pub const OP_DIVASSIGN: u8 = 24;
pub const OP_SELECT: u8 = 31;
pub const OP_LOGICALOR: u8 = 32;
pub const OP_LOGICALXOR: u8 = 33;
pub const OP_LOGICALAND: u8 = 34;
pub const OP_EQUAL: u8 = 38;
pub const OP_NOTEQUAL: u8 = 39;
pub const OP_LESS: u8 = 40;
pub const OP_GREATER: u8 = 41;
pub const OP_LESSEQUAL: u8 = 42;
pub const OP_GREATEREQUAL: u8 = 43;
pub const OP_ADD: u8 = 46;
pub const OP_SUBTRACT: u8 = 47;
pub const OP_MULTIPLY: u8 = 48;
pub const OP_DIVIDE: u8 = 49;
pub const OP_PREINCREMENT: u8 = 51;
pub const OP_PREDECREMENT: u8 = 52;
pub const OP_PLUS: u8 = 53;
pub const OP_MINUS: u8 = 54;
pub const OP_NOT: u8 = 56;
pub const OP_SUBSCRIPT: u8 = 57;
pub const OP_CALL: u8 = 58;
pub const OP_FIELD: u8 = 59;
pub const OP_POSTINCREMENT: u8 = 60;
pub const OP_POSTDECREMENT: u8 = 61;
pub const OP_PRECISION: u8 = 62;
pub const OP_METHOD: u8 = 63;

/* PARAMETER QUALIFIERS */
pub const PARAM_QUALIFIER_IN: u8 = 0;
pub const PARAM_QUALIFIER_OUT: u8 = 1;
pub const PARAM_QUALIFIER_INOUT: u8 = 2;

/* FUNCTION PARAMETERS */
pub const PARAMETER_NONE: u8 = 0;
pub const PARAMETER_NEXT: u8 = 1;

/* PARAMETER ARRAYNESS */
pub const PARAMETER_ARRAY_NOT_PRESENT: u8 = 0;
pub const PARAMETER_ARRAY_PRESENT: u8 = 1;

/* LITERAL ENCODINGS */
/// Precedes the text of a numeric literal.
pub const LITERAL_NUMBER: u8 = 1;
/// Precedes the `'0'` or `'1'` of a boolean literal.
pub const LITERAL_BOOL: u8 = 2;

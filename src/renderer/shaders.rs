//! Embedded Phong program plus the attribute/uniform names the scene graph
//! binds against it.

pub const POSITION_ATTRIBUTE: &str = "vPosition";
pub const NORMAL_ATTRIBUTE: &str = "vNormal";
pub const UV_ATTRIBUTE: &str = "vTexCoord";

pub const MODEL_MATRIX: &str = "modelMatrix";
pub const VIEW_MATRIX: &str = "viewMatrix";
pub const PROJECTION_MATRIX: &str = "projectionMatrix";

pub const AMBIENT_PRODUCT: &str = "ambientProduct";
pub const DIFFUSE_PRODUCT: &str = "diffuseProduct";
pub const SPECULAR_PRODUCT: &str = "specularProduct";
pub const LIGHT_POSITION: &str = "lightPosition";
pub const SHININESS: &str = "shininess";

pub const PLACEHOLDER_SAMPLER: &str = "placeholderTexture";

pub const PHONG_VERTEX_SHADER: &str = r#"#version 330 core
in vec4 vPosition;
in vec4 vNormal;
in vec2 vTexCoord;

uniform mat4 modelMatrix;
uniform mat4 viewMatrix;
uniform mat4 projectionMatrix;
uniform vec4 lightPosition;

out vec3 fN;
out vec3 fL;
out vec3 fE;
out vec2 fTexCoord;

void main() {
    mat4 modelView = viewMatrix * modelMatrix;
    vec4 eyePosition = modelView * vPosition;

    // parsed normals carry w = 1; treat them as directions
    fN = mat3(modelView) * vNormal.xyz;
    fL = (viewMatrix * lightPosition).xyz - eyePosition.xyz;
    fE = -eyePosition.xyz;
    fTexCoord = vTexCoord;

    gl_Position = projectionMatrix * eyePosition;
}
"#;

pub const PHONG_FRAGMENT_SHADER: &str = r#"#version 330 core
in vec3 fN;
in vec3 fL;
in vec3 fE;
in vec2 fTexCoord;

uniform vec4 ambientProduct;
uniform vec4 diffuseProduct;
uniform vec4 specularProduct;
uniform float shininess;
uniform sampler2D placeholderTexture;

out vec4 fragColor;

void main() {
    vec3 N = normalize(fN);
    vec3 L = normalize(fL);
    vec3 E = normalize(fE);
    vec3 H = normalize(L + E);

    float lambert = max(dot(L, N), 0.0);
    float highlight = lambert > 0.0 ? pow(max(dot(N, H), 0.0), shininess) : 0.0;

    vec4 colour = ambientProduct + lambert * diffuseProduct + highlight * specularProduct;
    // the placeholder only contributes alpha, so untextured models keep their material colour
    colour.a = texture(placeholderTexture, fTexCoord).a;
    fragColor = colour;
}
"#;
